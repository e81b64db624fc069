/// Decomposes a host search filter such as `*.*`, `*.txt` or `report*.csv`
/// into the literal filename prefix to list with and the extension suffix a
/// surviving name must end with. An empty component is unconstrained; a
/// wildcard anywhere in a component loosens it to empty. Any directory part
/// in the filter is dropped. Malformed filters are never rejected.
pub fn split_filter(filter: &str) -> (String, String) {
    let normalized = filter.replace('\\', "/");
    let name = match normalized.rsplit_once('/') {
        Some((_, name)) => name,
        None => normalized.as_str(),
    };

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (name, ""),
    };

    let prefix = match stem.find('*') {
        Some(pos) => &stem[..pos],
        None => stem,
    };

    let suffix = if extension.is_empty() || extension.contains('*') {
        String::new()
    } else {
        format!(".{}", extension)
    };

    (prefix.to_string(), suffix)
}
