//! Makes the page match the active preference values.
//!
//! Every function takes the value to reflect as an argument instead of
//! reading it back from the document, and only touches class lists and
//! control attributes. Root attributes are written by the coordinator.
//! Each call is idempotent and safe to repeat after a partial-page swap.

use crate::dom::{
    CATEGORY_LITE_CLASS, CATEGORY_PREFIX, Document, Element, NON_CATEGORY_CLASSES, PREVIEW_CONTAINER_ID, Query,
    SELECTED_CLASS, TILE_CLASS, TILE_LITE_CLASS, set_class,
};
use crate::{ColorPalette, PreferenceKind, TileStyle};

const TILES: Query = Query::class(TILE_CLASS);
const CATEGORY_CHIPS: Query = Query::class_prefix(CATEGORY_PREFIX);
const PREVIEW_TILES: Query = Query::class(TILE_CLASS).within(PREVIEW_CONTAINER_ID);

/// Whether a class list marks a colored category chip.
#[must_use]
pub fn is_category_chip(classes: &[String]) -> bool {
    classes.iter().any(|c| {
        c.starts_with(CATEGORY_PREFIX) && c != CATEGORY_LITE_CLASS && !NON_CATEGORY_CLASSES.contains(&c.as_str())
    })
}

/// Apply `style` to every material tile and category chip on the page.
pub fn apply_tile_style<D: Document + ?Sized>(doc: &D, style: TileStyle) {
    let lite = style == TileStyle::Lite;
    for tile in doc.query_all(&TILES) {
        set_class(&tile, TILE_LITE_CLASS, lite);
    }
    for chip in doc.query_all(&CATEGORY_CHIPS) {
        if is_category_chip(&chip.classes()) {
            set_class(&chip, CATEGORY_LITE_CLASS, lite);
        }
    }
}

/// Mark the palette choice control for `palette` as selected.
pub fn update_theme_selector<D: Document + ?Sized>(doc: &D, palette: ColorPalette) {
    update_choice_controls(doc, PreferenceKind::Palette, palette.as_str());
}

/// Mark the tile-style choice control for `style` as selected.
pub fn update_style_selector<D: Document + ?Sized>(doc: &D, style: TileStyle) {
    update_choice_controls(doc, PreferenceKind::TileStyle, style.as_str());
}

fn update_choice_controls<D: Document + ?Sized>(doc: &D, kind: PreferenceKind, value: &str) {
    let attribute = kind.choice_attribute();
    for control in doc.query_all(&Query::attribute(attribute)) {
        let selected = control.attribute(attribute).as_deref() == Some(value);
        set_class(&control, SELECTED_CLASS, selected);
        control.set_attribute("aria-pressed", if selected { "true" } else { "false" });
    }
}

/// Apply `style` to tiles inside the settings preview container, if present.
pub fn update_live_preview<D: Document + ?Sized>(doc: &D, style: TileStyle) {
    if !doc.has_element_id(PREVIEW_CONTAINER_ID) {
        return;
    }
    let lite = style == TileStyle::Lite;
    for tile in doc.query_all(&PREVIEW_TILES) {
        set_class(&tile, TILE_LITE_CLASS, lite);
    }
}

#[cfg(test)]
#[path = "reflector_test.rs"]
mod tests;
