//! Parsing of the screener's `tinytable` listing into raw rows.
//!
//! Low-level HTML string slicing, deliberately naive but tailored to the
//! listing structure. Tag matching is case-insensitive on ASCII names.
//! Headers are read dynamically and folded through [`Column::from_header`],
//! so column order differences between list pages do not matter.

use crate::core::{Column, RawRow};

/// Parse one listing page. Returns an empty vector when the page carries no
/// recognizable table, which callers treat as source exhaustion.
pub(crate) fn parse_listing(html: &str) -> Vec<RawRow> {
    let Some(table) = find_tinytable(html) else {
        return Vec::new();
    };

    let headers = read_headers(table);
    if headers.iter().all(Option::is_none) {
        return Vec::new();
    }

    let rows_region = slice_between_ci(table, "<tbody", "</tbody>").unwrap_or(table);

    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((tr_s, tr_e)) = next_tag_block_ci(rows_region, "<tr", "</tr>", pos) {
        let tr = &rows_region[tr_s..tr_e];
        pos = tr_e;

        let mut row = RawRow::new();
        let mut td_pos = 0usize;
        let mut idx = 0usize;
        while let Some((td_s, td_e)) = next_tag_block_ci(tr, "<td", "</td>", td_pos) {
            let block = &tr[td_s..td_e];
            td_pos = td_e;
            if let Some(Some(col)) = headers.get(idx) {
                row.insert(*col, clean_cell(&inner_after_open_tag(block)));
            }
            idx += 1;
        }
        // header rows and ad rows map no cells
        if !row.is_empty() {
            out.push(row);
        }
    }
    out
}

/// Locate the inner HTML of the first `<table>` whose opening tag mentions
/// `tinytable`.
fn find_tinytable(html: &str) -> Option<&str> {
    let lc = to_lowercase_fast(html);
    let mut from = 0usize;
    loop {
        let start = lc.get(from..)?.find("<table")? + from;
        let open_end = html[start..].find('>')? + start + 1;
        if lc[start..open_end].contains("tinytable") {
            let close_rel = lc[open_end..].find("</table")?;
            return Some(&html[open_end..open_end + close_rel]);
        }
        from = open_end;
    }
}

/// Read the `<th>` cells of the header region, mapped to canonical columns by
/// position. `None` entries are unmapped headers (checkbox, performance
/// columns) whose cells are skipped.
fn read_headers(table: &str) -> Vec<Option<Column>> {
    let region = slice_between_ci(table, "<thead", "</thead>").unwrap_or(table);
    let mut headers = Vec::new();
    let mut pos = 0usize;
    while let Some((th_s, th_e)) = next_tag_block_ci(region, "<th", "</th>", pos) {
        let block = &region[th_s..th_e];
        pos = th_e;
        headers.push(Column::from_header(&clean_cell(&inner_after_open_tag(
            block,
        ))));
    }
    headers
}

fn clean_cell(inner: &str) -> String {
    strip_tags(&decode_entities(inner))
}

/* ---------- string slicing primitives ---------- */

/// The HTML between an opening tag (matched by prefix, case-insensitive) and
/// the next matching closing tag.
fn slice_between_ci<'a>(s: &'a str, open_pat: &str, close_pat: &str) -> Option<&'a str> {
    let lc = to_lowercase_fast(s);
    let open_idx = lc.find(&to_lowercase_fast(open_pat))?;
    let after_open = s[open_idx..].find('>')? + open_idx + 1;
    let close_rel = lc[after_open..].find(&to_lowercase_fast(close_pat))?;
    Some(&s[after_open..after_open + close_rel])
}

/// The next complete `<tag ...>...</tag>` block from `from` onwards, as
/// `(start, end)` byte offsets covering the whole block.
fn next_tag_block_ci(s: &str, open_tag: &str, close_tag: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lowercase_fast(s);
    let start = lc.get(from..)?.find(&to_lowercase_fast(open_tag))? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(&to_lowercase_fast(close_tag))?;
    Some((start, open_end + end_rel + close_tag.len()))
}

/// Given a complete block like `<td ...>INNER</td>`, return INNER (which may
/// still contain nested tags).
fn inner_after_open_tag(block: &str) -> String {
    if let Some(open_end) = block.find('>')
        && let Some(close_start) = block.rfind('<')
        && close_start > open_end
    {
        return block[open_end + 1..close_start].to_string();
    }
    String::new()
}

/// Replace every `<...>` with a space, then collapse whitespace. Tags become
/// separators so text in adjacent elements does not fuse.
fn strip_tags(s: &str) -> String {
    let mut flat = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => {
                in_tag = true;
                flat.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => flat.push(ch),
            _ => {}
        }
    }
    normalize_ws(&flat)
}

/// The handful of entities the listing actually uses.
fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&Delta;", "Δ")
        .replace("&delta;", "δ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs into single spaces and trim.
fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// ASCII-only lowercasing for tag matching; non-ASCII passes through.
fn to_lowercase_fast(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}
