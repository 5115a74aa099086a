//! Missing-value tokens.
//!
//! Exports mark absent values the way spreadsheet and dataframe tools
//! write them. Any cell equal to one of these tokens (case-sensitive,
//! untrimmed) loads as `None`, the same as an empty cell.

/// Cell contents read as a missing value.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

/// `None` for missing cells, the owned value otherwise.
pub fn present(cell: Option<&str>) -> Option<String> {
    cell.filter(|v| !is_missing(v)).map(str::to_string)
}
