use super::*;

fn active(palette: ColorPalette, style: TileStyle) -> ActivePreferences {
    ActivePreferences { color_palette: palette, tile_style: style }
}

// =============================================================================
// render_settings
// =============================================================================

#[test]
fn root_carries_active_values() {
    let html = render_settings(active(ColorPalette::HighContrast, TileStyle::Lite), "t", Some("trader"));
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"<html lang="en" data-theme="high-contrast" data-tile-style="lite">"#));
}

#[test]
fn anonymous_render_marks_root_without_session() {
    let html = render_settings(ActivePreferences::default(), "t", None);
    assert!(html.contains(r#"data-tile-style="filled" data-session="none">"#));

    let signed_in = render_settings(ActivePreferences::default(), "t", Some("trader"));
    assert!(!signed_in.contains("data-session"));
}

#[test]
fn csrf_meta_tag_is_present() {
    let html = render_settings(ActivePreferences::default(), "abc.1.ff", None);
    assert!(html.contains(r#"<meta name="csrf-token" content="abc.1.ff">"#));
}

#[test]
fn csrf_token_is_attribute_escaped() {
    let html = render_settings(ActivePreferences::default(), r#"a"b<c"#, None);
    assert!(html.contains(r#"content="a&quot;b&lt;c""#));
}

#[test]
fn boot_script_is_not_escaped() {
    let html = render_settings(ActivePreferences::default(), "t", None);
    assert!(html.contains(r#"<script type="module">import init from "/pkg/client.js"; init();</script>"#));
}

#[test]
fn every_choice_has_a_control() {
    let html = render_settings(ActivePreferences::default(), "t", None);
    for palette in ColorPalette::ALL {
        assert!(html.contains(&format!(r#"data-theme-choice="{palette}""#)), "missing {palette}");
    }
    for style in TileStyle::ALL {
        assert!(html.contains(&format!(r#"data-tile-style-choice="{style}""#)), "missing {style}");
    }
}

#[test]
fn active_choices_are_marked_selected() {
    let html = render_settings(active(ColorPalette::Monochrome, TileStyle::Filled), "t", None);
    assert!(html.contains(r#"data-theme-choice="monochrome" class="active" aria-pressed="true""#));
    assert!(html.contains(r#"data-theme-choice="refined-prun" aria-pressed="false""#));
    assert!(html.contains(r#"data-tile-style-choice="filled" class="active" aria-pressed="true">Filled</button>"#));
}

#[test]
fn preview_follows_tile_style() {
    let lite = render_settings(active(ColorPalette::RefinedPrun, TileStyle::Lite), "t", None);
    assert!(lite.contains(r#"<div id="theme-preview">"#));
    assert!(lite.contains(r#"class="material-tile material-tile-lite""#));
    assert!(lite.contains(r#"class="cat-consumables-basic cat-lite""#));
    assert!(lite.contains(r#"class="cat-legend""#));

    let filled = render_settings(ActivePreferences::default(), "t", None);
    assert!(!filled.contains("material-tile-lite"));
    assert!(!filled.contains("cat-lite"));
}

#[test]
fn user_name_is_escaped() {
    let html = render_settings(ActivePreferences::default(), "t", Some("<b>x</b>"));
    assert!(html.contains("Signed in as &lt;b&gt;x&lt;/b&gt;"));
    assert!(!html.contains("<b>x</b>"));
}

#[test]
fn anonymous_greeting_mentions_device_storage() {
    let html = render_settings(ActivePreferences::default(), "t", None);
    assert!(html.contains("Not signed in"));
}
