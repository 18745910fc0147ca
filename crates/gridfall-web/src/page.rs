#![forbid(unsafe_code)]

//! Page naming: the ids, classes, selectors and attribute names the DOM
//! executor addresses. Kept bindgen-free so selector construction and
//! attribute parsing stay testable on native.
//!
//! User-facing strings are French: that is the product's language, inherited
//! from the page markup and stylesheet this client drives.

/// Class carried by every column button; also used as a query selector.
pub const COLUMN_BUTTON_CLASS: &str = "col-btn";
/// Selector matching all column buttons.
pub const COLUMN_BUTTON_SELECTOR: &str = ".col-btn";

/// Attribute naming a button's (and a cell's) column.
pub const DATA_COL_ATTR: &str = "data-col";
/// Attribute naming a cell's row.
pub const DATA_ROW_ATTR: &str = "data-row";

/// End-of-game overlay element id, and the selector of its text node.
pub const END_OVERLAY_ID: &str = "overlay-fin";
pub const END_OVERLAY_TEXT_SELECTOR: &str = ".texte-fin";

/// Status line element id (whose turn it is).
pub const STATUS_ID: &str = "statut-partie";

/// Inverted-gravity hint element id and its text when shown.
pub const GRAVITY_HINT_ID: &str = "indicateur-gravite";
pub const GRAVITY_HINT_TEXT: &str = "Gravité inversée !";

/// Floating enter-fullscreen button: id, class, glyph and tooltip.
pub const FULLSCREEN_BUTTON_ID: &str = "floating-fullscreen-btn";
pub const FULLSCREEN_BUTTON_CLASS: &str = "floating-fullscreen-btn";
pub const FULLSCREEN_BUTTON_GLYPH: &str = "🖥️";
pub const FULLSCREEN_BUTTON_TITLE: &str = "Activer le plein écran";

/// Fullscreen Esc hint: id, class and inner markup.
pub const FULLSCREEN_HINT_ID: &str = "fullscreen-hint";
pub const FULLSCREEN_HINT_CLASS: &str = "fullscreen-indicator";
pub const FULLSCREEN_HINT_HTML: &str =
    "<span>Appuyez sur <kbd>Échap</kbd> pour quitter le plein écran</span>";

/// `display` values used when toggling the floating widgets.
pub const DISPLAY_FLEX: &str = "flex";
pub const DISPLAY_BLOCK: &str = "block";
pub const DISPLAY_NONE: &str = "none";

/// Selector addressing one grid cell.
#[must_use]
pub fn cell_selector(row: u16, col: u16) -> String {
    format!("[{DATA_ROW_ATTR}=\"{row}\"][{DATA_COL_ATTR}=\"{col}\"]")
}

/// Parse a `data-col` attribute value. The attribute is authored by hand in
/// the page markup, so surrounding whitespace is tolerated; anything else is
/// not a column.
#[must_use]
pub fn parse_data_col(raw: &str) -> Option<u16> {
    raw.trim().parse().ok()
}
