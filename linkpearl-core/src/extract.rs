//! Reconstruction of tooltip data from a wiki item page.
//!
//! The wiki lays an item's statistics out visually: a table-styled div pair
//! (icon cell + stat cell) under the Statistics heading, stat lines joined
//! with `<br>`, elemental resistances drawn as icons, rarity badges inlined
//! next to the item name. This module walks that structure and reduces it to
//! ordered plain-text lines, a list of hidden-effect strings, and a flavor
//! description.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::models::RawTooltip;

lazy_static! {
    static ref STATISTICS_ANCHOR: Selector = Selector::parse("#Statistics").unwrap();
    static ref TABLE_CELL: Selector = Selector::parse(r#"div[style*="display:table-cell"]"#).unwrap();
    static ref IMAGE: Selector = Selector::parse("img").unwrap();
    static ref LIST_ITEM: Selector = Selector::parse("li").unwrap();
    static ref ITALIC: Selector = Selector::parse("i, em").unwrap();
    static ref BR_TAG: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref BOLD_OPEN: Regex = Regex::new(r"(?i)<(?:b|strong)\b[^>]*>").unwrap();
    static ref SIGNED_INT: Regex = Regex::new(r"^[+-]\d+$").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

const HIDDEN_EFFECT_MARKER: &str = "Hidden Effect";

/// How many sibling elements past the stat table are searched for a hidden
/// effect marker.
const HIDDEN_EFFECT_LOOKAHEAD: usize = 5;

/// Parse a page's tooltip data. Returns `None` when the page has no
/// Statistics section at all; an empty `RawTooltip` means the section exists
/// but held nothing extractable.
pub fn extract_tooltip(document: &Html) -> Option<RawTooltip> {
    let anchor = document.select(&STATISTICS_ANCHOR).next()?;
    let heading = anchor.parent().and_then(ElementRef::wrap)?;

    let mut tooltip = RawTooltip::default();

    if let Some(container) = find_stat_table(heading) {
        if let Some(cell) = select_stat_cell(container) {
            let cell = unwrap_nested_cell(cell);
            tooltip.lines = reconstruct_lines(cell);
            tooltip.hidden_effects = extract_hidden_effects(container);
        }
    }

    tooltip.description = extract_description(heading);

    Some(tooltip)
}

/// First sibling div after the heading whose inline style makes it a table.
fn find_stat_table(heading: ElementRef) -> Option<ElementRef> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|element| {
            element.value().name() == "div"
                && element
                    .value()
                    .attr("style")
                    .is_some_and(|style| style.contains("display:table"))
        })
}

/// The stat cell is the second table-cell when an icon cell precedes it,
/// otherwise the only one.
fn select_stat_cell(container: ElementRef) -> Option<ElementRef> {
    let cells: Vec<ElementRef> = container.select(&TABLE_CELL).collect();
    match cells.len() {
        0 => None,
        1 => Some(cells[0]),
        _ => Some(cells[1]),
    }
}

/// Some pages wrap the stat lines in one extra div inside the cell. The cell
/// is unwrapped exactly when it has a single child div which itself has more
/// than one child div; anything else is taken as-is.
pub(crate) fn unwrap_nested_cell(cell: ElementRef) -> ElementRef {
    let children = child_divs(cell);
    if children.len() == 1 && child_divs(children[0]).len() > 1 {
        children[0]
    } else {
        cell
    }
}

fn child_divs(element: ElementRef) -> Vec<ElementRef> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "div")
        .collect()
}

/// Walk the stat cell's child divs in order, skipping the first (item name
/// and rarity badges), and reduce each to one or more text lines.
fn reconstruct_lines(cell: ElementRef) -> Vec<String> {
    let mut lines = Vec::new();

    for (index, child) in child_divs(cell).into_iter().enumerate() {
        if index == 0 {
            continue;
        }

        let inner = child.inner_html();
        if BR_TAG.is_match(&inner) {
            for part in BR_TAG.split(&inner) {
                push_fragment_lines(part, false, &mut lines);
            }
        } else {
            push_fragment_lines(&inner, true, &mut lines);
        }
    }

    lines
}

/// Reduce one HTML fragment to text and append the non-empty result(s).
/// Fragments holding several bolded stat names are split so each stat lands
/// on its own line, the way the client renders them.
fn push_fragment_lines(fragment: &str, collapse_whitespace: bool, lines: &mut Vec<String>) {
    for piece in split_crammed_stats(fragment) {
        let parsed = Html::parse_fragment(piece);
        let mut text = String::new();
        reduce_children(parsed.root_element(), &mut text);

        let line = if collapse_whitespace {
            WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
        } else {
            text.trim().to_string()
        };

        if !line.is_empty() {
            lines.push(line);
        }
    }
}

/// Split a fragment at every bold-tag boundary past the first, yielding one
/// sub-fragment per bolded stat. Fragments with at most one bold tag pass
/// through whole.
fn split_crammed_stats(fragment: &str) -> Vec<&str> {
    let starts: Vec<usize> = BOLD_OPEN
        .find_iter(fragment)
        .map(|found| found.start())
        .collect();
    if starts.len() < 2 {
        return vec![fragment];
    }

    let mut pieces = Vec::new();
    let mut previous = 0;
    for &start in &starts[1..] {
        pieces.push(&fragment[previous..start]);
        previous = start;
    }
    pieces.push(&fragment[previous..]);
    pieces
}

/// Depth-first reduction of a node's children to display text.
fn reduce_children(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                // Adjacent resistance values render with no gap in the source
                if SIGNED_INT.is_match(text) {
                    out.push(' ');
                }
            }
            Node::Element(node) => match node.name() {
                "br" => out.push(' '),
                "img" => {
                    if let Some(alt) = node.attr("alt") {
                        if let Some(subject) = alt.strip_prefix("Resistance to ") {
                            out.push_str(subject.trim());
                            out.push(' ');
                        } else if alt.contains("Resistance") {
                            let subject = alt.replace(" Resistance", "");
                            out.push_str(subject.trim());
                            out.push(' ');
                        }
                    }
                }
                "a" => {
                    if let Some(anchor) = ElementRef::wrap(child) {
                        match node.attr("title") {
                            Some(title) if title.contains("Resistance") => {
                                let subject = title.replace(" Resistance", "");
                                out.push_str(subject.trim());
                                out.push(' ');
                            }
                            _ => {
                                let link_text: String = anchor.text().collect();
                                if link_text.is_empty() {
                                    // Pure icon link; its children may still
                                    // carry resistance images
                                    reduce_children(anchor, out);
                                } else {
                                    out.push_str(&link_text);
                                }
                            }
                        }
                    }
                }
                "b" | "strong" => {
                    if let Some(bold) = ElementRef::wrap(child) {
                        reduce_children(bold, out);
                    }
                }
                "span" => {
                    if let Some(span) = ElementRef::wrap(child) {
                        if !has_rarity_badge(span) {
                            reduce_children(span, out);
                        }
                    }
                }
                _ => {
                    if let Some(other) = ElementRef::wrap(child) {
                        reduce_children(other, out);
                    }
                }
            },
            _ => {}
        }
    }
}

/// Spans holding the Rare/Exclusive badge images are decoration, not stats.
fn has_rarity_badge(span: ElementRef) -> bool {
    span.select(&IMAGE)
        .any(|image| matches!(image.value().attr("alt"), Some("Rare" | "Exclusive")))
}

/// Collect hidden effect entries from the elements following the stat table.
/// The walk stops at the next heading and inspects at most
/// `HIDDEN_EFFECT_LOOKAHEAD` siblings; list items repeating the marker text
/// itself are excluded.
fn extract_hidden_effects(stat_table: ElementRef) -> Vec<String> {
    let mut effects = Vec::new();
    let mut found_marker = false;
    let mut current = next_element_sibling(stat_table);

    for _ in 0..HIDDEN_EFFECT_LOOKAHEAD {
        let Some(element) = current else { break };

        if is_heading(element) {
            break;
        }

        let text: String = element.text().collect();
        if text.contains(HIDDEN_EFFECT_MARKER) {
            found_marker = true;
        }

        if found_marker {
            for item in element.select(&LIST_ITEM) {
                let effect = item.text().collect::<String>().trim().to_string();
                if !effect.is_empty() && !effect.contains(HIDDEN_EFFECT_MARKER) {
                    effects.push(effect);
                }
            }

            if next_element_sibling(element).is_some_and(is_heading) {
                break;
            }
        }

        current = next_element_sibling(element);
    }

    effects
}

/// Flavor text: italic runs between the Statistics heading and the next
/// section heading, skipping hidden-effect prose and storage-slip notes.
fn extract_description(heading: ElementRef) -> String {
    let mut description = String::new();
    let mut current = next_element_sibling(heading);

    while let Some(element) = current {
        if matches!(element.value().name(), "h2" | "h3") {
            break;
        }

        let text: String = element.text().collect();
        if !text.contains(HIDDEN_EFFECT_MARKER) {
            let italic: String = element.select(&ITALIC).flat_map(|i| i.text()).collect();
            let italic = italic.trim();
            if !italic.is_empty()
                && !italic.contains(HIDDEN_EFFECT_MARKER)
                && !italic.contains("Storage Slip")
            {
                description.push_str(italic);
                description.push(' ');
            }
        }

        current = next_element_sibling(element);
    }

    description.trim().to_string()
}

fn next_element_sibling(element: ElementRef) -> Option<ElementRef> {
    element.next_siblings().find_map(ElementRef::wrap)
}

fn is_heading(element: ElementRef) -> bool {
    matches!(element.value().name(), "h2" | "h3" | "h4")
}
