//! Cell content and cached values
//!
//! A [`Cell`] owns its content, a lazily filled value cache and the set of
//! positions whose formulas read it. The forward edges are the content's
//! referenced cells; the back-edges are kept here so invalidation can walk
//! outward without scanning the grid.

use ahash::AHashSet;
use once_cell::unsync::OnceCell;
use tabula_core::{CellError, Position, Value, ESCAPE_SIGN, FORMULA_SIGN};
use tabula_formula::{Formula, FormulaResult};

use crate::sheet::Sheet;

/// What a cell holds
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellContent {
    /// No content; reads as zero
    #[default]
    Empty,

    /// Literal text, possibly numeric or escaped
    Text(String),

    /// Parsed formula
    Formula(Formula),
}

impl CellContent {
    /// Classify raw user input
    ///
    /// `""` is empty, `=` followed by at least one character is a formula,
    /// everything else (a lone `=` included) is text. A formula that does not
    /// parse is an error rather than falling back to text.
    pub fn from_text(text: &str) -> FormulaResult<Self> {
        if text.is_empty() {
            return Ok(CellContent::Empty);
        }

        match text.strip_prefix(FORMULA_SIGN) {
            Some(expression) if !expression.is_empty() => {
                Ok(CellContent::Formula(Formula::parse(expression)?))
            }
            _ => Ok(CellContent::Text(text.to_string())),
        }
    }

    /// The text a user would see when editing the cell
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(formula) => format!("{}{}", FORMULA_SIGN, formula.expression()),
        }
    }

    /// Positions read by this content, sorted and de-duplicated
    pub fn referenced_cells(&self) -> &[Position] {
        match self {
            CellContent::Formula(formula) => formula.referenced_cells(),
            CellContent::Empty | CellContent::Text(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula(_))
    }
}

/// Value of literal text
///
/// Escaped text loses its marker and is never numeric. Otherwise the text is a
/// number when all of it, after leading whitespace, parses as a finite float.
fn text_value(text: &str) -> Value {
    if let Some(escaped) = text.strip_prefix(ESCAPE_SIGN) {
        return Value::text(escaped);
    }

    match text.trim_start().parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(n),
        _ => Value::text(text),
    }
}

/// A single grid cell
#[derive(Debug, Default)]
pub struct Cell {
    content: CellContent,
    cache: OnceCell<Value>,
    dependents: AHashSet<Position>,
}

impl Cell {
    pub(crate) fn with_dependents(dependents: AHashSet<Position>) -> Self {
        Self {
            dependents,
            ..Self::default()
        }
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// Raw text of the cell, formulas in canonical form
    pub fn text(&self) -> String {
        self.content.text()
    }

    /// Positions this cell's formula reads
    pub fn referenced_cells(&self) -> &[Position] {
        self.content.referenced_cells()
    }

    /// Positions of the formulas that read this cell
    pub fn dependents(&self) -> impl Iterator<Item = Position> + '_ {
        self.dependents.iter().copied()
    }

    /// Whether any formula reads this cell
    pub fn is_referenced(&self) -> bool {
        !self.dependents.is_empty()
    }

    /// The cached value, if it has been computed since the last invalidation
    pub fn cached_value(&self) -> Option<&Value> {
        self.cache.get()
    }

    /// Computed value of the cell, which must belong to `sheet`
    ///
    /// The first call after an invalidation computes and caches the value;
    /// later calls return the cached copy. Uncached references are filled
    /// first, so computing this cell only looks one level down. Evaluation
    /// errors are part of the value, so this never fails.
    pub(crate) fn value(&self, sheet: &Sheet) -> Value {
        if let Some(value) = self.cache.get() {
            return value.clone();
        }
        sheet.fill_caches(self.referenced_cells());
        self.cache.get_or_init(|| self.compute(sheet)).clone()
    }

    fn compute(&self, sheet: &Sheet) -> Value {
        match &self.content {
            CellContent::Empty => Value::Number(0.0),
            CellContent::Text(text) => text_value(text),
            CellContent::Formula(formula) => {
                sheet.record_evaluation();
                let lookup = |pos: Position| -> Result<f64, CellError> { sheet.number_at(pos) };
                match formula.evaluate(&lookup) {
                    Ok(n) => Value::Number(n),
                    Err(e) => Value::Error(e),
                }
            }
        }
    }

    /// Replace the content, returning the old one; the caller invalidates
    pub(crate) fn replace_content(&mut self, content: CellContent) -> CellContent {
        std::mem::replace(&mut self.content, content)
    }

    /// Drop the cached value, reporting whether there was one
    pub(crate) fn invalidate(&mut self) -> bool {
        self.cache.take().is_some()
    }

    pub(crate) fn add_dependent(&mut self, pos: Position) {
        self.dependents.insert(pos);
    }

    pub(crate) fn remove_dependent(&mut self, pos: Position) {
        self.dependents.remove(&pos);
    }

    pub(crate) fn take_dependents(&mut self) -> AHashSet<Position> {
        std::mem::take(&mut self.dependents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_input() {
        assert_eq!(CellContent::from_text("").unwrap(), CellContent::Empty);
        assert_eq!(
            CellContent::from_text("=").unwrap(),
            CellContent::Text("=".to_string())
        );
        assert_eq!(
            CellContent::from_text("hello").unwrap(),
            CellContent::Text("hello".to_string())
        );
        assert!(CellContent::from_text("=1+2").unwrap().is_formula());
        assert!(CellContent::from_text("=1+").is_err());
        assert!(CellContent::from_text("=A1B").is_err());
    }

    #[test]
    fn test_text_round_trip() {
        for text in ["", "plain", "'=escaped", "  42", "="] {
            assert_eq!(CellContent::from_text(text).unwrap().text(), text);
        }
        assert_eq!(CellContent::from_text("= 1 + (2)").unwrap().text(), "=1+2");
    }

    #[test]
    fn test_text_values() {
        assert_eq!(text_value("42"), Value::Number(42.0));
        assert_eq!(text_value("  -1.5e2"), Value::Number(-150.0));
        assert_eq!(text_value("42 "), Value::text("42 "));
        assert_eq!(text_value("12abc"), Value::text("12abc"));
        assert_eq!(text_value("inf"), Value::text("inf"));
        assert_eq!(text_value("'42"), Value::text("42"));
        assert_eq!(text_value("'"), Value::text(""));
        assert_eq!(text_value("="), Value::text("="));
    }

    #[test]
    fn test_referenced_cells_by_variant() {
        assert!(CellContent::Empty.referenced_cells().is_empty());
        assert!(CellContent::Text("A1".into()).referenced_cells().is_empty());

        let content = CellContent::from_text("=B1+A1+B1").unwrap();
        assert_eq!(
            content.referenced_cells(),
            &[Position::new(0, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn test_cell_values_are_cached() {
        let sheet = Sheet::new();
        let mut cell = Cell::default();
        cell.replace_content(CellContent::from_text("=1/0").unwrap());

        assert_eq!(cell.cached_value(), None);
        assert_eq!(cell.value(&sheet), Value::Error(CellError::Div0));
        assert_eq!(cell.cached_value(), Some(&Value::Error(CellError::Div0)));
        assert_eq!(sheet.stats().evaluations, 1);

        cell.value(&sheet);
        assert_eq!(sheet.stats().evaluations, 1);

        assert!(cell.invalidate());
        assert!(!cell.invalidate());
        assert_eq!(cell.cached_value(), None);
    }

    #[test]
    fn test_dependents() {
        let mut cell = Cell::default();
        assert!(!cell.is_referenced());

        cell.add_dependent(Position::new(1, 1));
        cell.add_dependent(Position::new(1, 1));
        assert_eq!(cell.dependents().collect::<Vec<_>>(), vec![Position::new(1, 1)]);

        cell.remove_dependent(Position::new(1, 1));
        assert!(!cell.is_referenced());
    }
}
