use facet_value::VObject;

/// Renders a flat result as one `"key" = value` line per entry, sorted by key.
pub fn render(flat: &VObject) -> String {
    let mut lines: Vec<String> = flat
        .iter()
        .map(|(key, value)| format!("{:?} = {value:?}", key.as_str()))
        .collect();
    lines.sort();
    lines.join("\n")
}
