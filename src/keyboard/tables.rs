// SPDX-License-Identifier: GPL-3.0-only

//! Fixed key tables for the alphabetic, numeric and symbol layouts.

use crate::keyboard::types::{
    Cell, KeyDescriptor, LayoutMode, Row, ALPHABETIC_MODE, BACKSPACE, ENTER, NUMERIC_MODE, SHIFT,
    SPACE, SYMBOL_MODE,
};

/// Width of the control keys at the row ends.
const CONTROL_WEIGHT: f32 = 1.5;

/// Side spacer of the middle alphabetic row.
const HOME_ROW_INSET: f32 = 0.25;

/// Returns the rows for a layout mode.
#[must_use]
pub fn rows_for(mode: LayoutMode) -> Vec<Row> {
    match mode {
        LayoutMode::Alphabetic => alphabetic_rows(),
        LayoutMode::Numeric => numeric_rows(),
        LayoutMode::Symbol => symbol_rows(),
    }
}

fn char_row(labels: &[&str]) -> Row {
    Row {
        cells: labels
            .iter()
            .map(|label| Cell::Key(KeyDescriptor::char(label)))
            .collect(),
    }
}

/// QWERTY with shift, backspace and the mode row.
#[must_use]
pub fn alphabetic_rows() -> Vec<Row> {
    let mut home = vec![Cell::Spacer(HOME_ROW_INSET)];
    home.extend(
        ["A", "S", "D", "F", "G", "H", "J", "K", "L"]
            .iter()
            .map(|label| Cell::Key(KeyDescriptor::char(label))),
    );
    home.push(Cell::Spacer(HOME_ROW_INSET));

    let mut third = vec![Cell::Key(KeyDescriptor::special(SHIFT, CONTROL_WEIGHT))];
    third.extend(
        ["Z", "X", "C", "V", "B", "N", "M"]
            .iter()
            .map(|label| Cell::Key(KeyDescriptor::char(label))),
    );
    third.push(Cell::Key(KeyDescriptor::special(BACKSPACE, CONTROL_WEIGHT)));

    vec![
        char_row(&["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"]),
        Row { cells: home },
        Row { cells: third },
        Row {
            cells: vec![
                Cell::Key(KeyDescriptor::special(NUMERIC_MODE, CONTROL_WEIGHT)),
                Cell::Key(KeyDescriptor::wide(".", CONTROL_WEIGHT)),
                Cell::Key(KeyDescriptor::wide(SPACE, 4.0)),
                Cell::Key(KeyDescriptor::special(ENTER, CONTROL_WEIGHT)),
            ],
        },
    ]
}

/// Digits, punctuation, and the numeric control row.
#[must_use]
pub fn numeric_rows() -> Vec<Row> {
    let mut third = vec![Cell::Key(KeyDescriptor::special(SYMBOL_MODE, CONTROL_WEIGHT))];
    third.extend(
        [".", ",", "?", "!", "'"]
            .iter()
            .map(|label| Cell::Key(KeyDescriptor::char(label))),
    );
    third.push(Cell::Key(KeyDescriptor::special(BACKSPACE, CONTROL_WEIGHT)));

    vec![
        char_row(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"]),
        char_row(&["-", "/", ":", ";", "(", ")", "$", "&", "@", "\""]),
        Row { cells: third },
        numeric_bottom_row(),
    ]
}

/// Brackets, currency, punctuation, and the symbol control row.
#[must_use]
pub fn symbol_rows() -> Vec<Row> {
    let mut third = vec![Cell::Key(KeyDescriptor::special(NUMERIC_MODE, CONTROL_WEIGHT))];
    third.extend(
        [".", ",", "?", "!", "'", "\"", ":", ";"]
            .iter()
            .map(|label| Cell::Key(KeyDescriptor::char(label))),
    );
    third.push(Cell::Key(KeyDescriptor::special(BACKSPACE, CONTROL_WEIGHT)));

    vec![
        char_row(&["[", "]", "{", "}", "#", "%", "^", "*", "+", "="]),
        char_row(&["_", "\\", "|", "~", "<", ">", "€", "£", "¥", "•"]),
        Row { cells: third },
        numeric_bottom_row(),
    ]
}

fn numeric_bottom_row() -> Row {
    Row {
        cells: vec![
            Cell::Key(KeyDescriptor::special(ALPHABETIC_MODE, CONTROL_WEIGHT)),
            Cell::Key(KeyDescriptor::wide(SPACE, 5.5)),
            Cell::Key(KeyDescriptor::special(ENTER, CONTROL_WEIGHT)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(row: &Row) -> Vec<&str> {
        row.keys().map(|key| key.label.as_str()).collect()
    }

    #[test]
    fn test_alphabetic_layout_shape() {
        let rows = alphabetic_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(labels(&rows[0]), ["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"]);
        assert_eq!(labels(&rows[1]).len(), 9);
        assert_eq!(labels(&rows[2]).first(), Some(&"⇧"));
        assert_eq!(labels(&rows[2]).last(), Some(&"⌫"));
        assert_eq!(labels(&rows[3]), ["123", ".", "espacio", "⏎"]);
    }

    #[test]
    fn test_home_row_is_inset() {
        let rows = alphabetic_rows();
        assert_eq!(rows[1].cells.first(), Some(&Cell::Spacer(0.25)));
        assert_eq!(rows[1].cells.last(), Some(&Cell::Spacer(0.25)));
        assert_eq!(rows[1].total_weight(), 9.5);
    }

    #[test]
    fn test_numeric_layout_shape() {
        let rows = numeric_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(labels(&rows[0]), ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"]);
        assert_eq!(labels(&rows[2]).first(), Some(&"#+="));
        assert_eq!(labels(&rows[3]), ["ABC", "espacio", "⏎"]);
    }

    #[test]
    fn test_symbol_layout_offers_way_back() {
        let rows = symbol_rows();
        assert_eq!(labels(&rows[1]).iter().filter(|l| **l == "€").count(), 1);
        assert_eq!(labels(&rows[2]).first(), Some(&"123"));
        assert_eq!(labels(&rows[3]).first(), Some(&"ABC"));
    }

    #[test]
    fn test_control_keys_are_special() {
        for mode in [LayoutMode::Alphabetic, LayoutMode::Numeric, LayoutMode::Symbol] {
            for row in rows_for(mode) {
                for key in row.keys() {
                    let control = matches!(
                        key.label.as_str(),
                        "⇧" | "⌫" | "⏎" | "123" | "ABC" | "#+="
                    );
                    assert_eq!(key.special, control, "key {} in {:?}", key.label, mode);
                }
            }
        }
    }
}
