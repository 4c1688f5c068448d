//! Extension-based routing
//!
//! The [`RoutingTable`] maps a file name to at most one [`BackendKind`]. Entries
//! are checked in declaration order and the first set containing the file's
//! extension wins. Overlapping sets are therefore legal here; configuration
//! loading rejects them separately (see [`crate::Config::validate`]).

use crate::backend_kind::BackendKind;
use crate::extension::ExtensionSet;

/// Extract the routing extension of a file name: the text after the final
/// `.`, lowercased. Names without a dot or with an empty suffix have none.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, suffix) = file_name.rsplit_once('.')?;
    if suffix.is_empty() {
        None
    } else {
        Some(suffix.to_lowercase())
    }
}

/// Ordered mapping from backend identifier to the extensions it accepts.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    entries: Vec<(BackendKind, ExtensionSet)>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend. Entries added earlier take priority.
    pub fn with_route(mut self, backend: BackendKind, extensions: ExtensionSet) -> Self {
        self.entries.push((backend, extensions));
        self
    }

    /// Route a file name to the first backend whose set contains its extension.
    pub fn route(&self, file_name: &str) -> Option<BackendKind> {
        let extension = extension_of(file_name)?;
        self.entries
            .iter()
            .find(|(_, set)| set.contains(&extension))
            .map(|(backend, _)| *backend)
    }

    /// Backends in routing priority order.
    pub fn backends(&self) -> impl Iterator<Item = BackendKind> + '_ {
        self.entries.iter().map(|(backend, _)| *backend)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RoutingTable {
        RoutingTable::new()
            .with_route(BackendKind::S3, ExtensionSet::parse_list("txt,csv"))
            .with_route(BackendKind::Gcs, ExtensionSet::parse_list("jpg,png"))
    }

    #[test]
    fn extension_is_text_after_last_dot() {
        assert_eq!(extension_of("report.TXT").as_deref(), Some("txt"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of(".bashrc").as_deref(), Some("bashrc"));
    }

    #[test]
    fn no_dot_or_empty_suffix_has_no_extension() {
        assert_eq!(extension_of("Makefile"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of(""), None);
    }

    #[test]
    fn routes_disjoint_sets_to_their_backend() {
        let table = table();
        assert_eq!(table.route("a.txt"), Some(BackendKind::S3));
        assert_eq!(table.route("data.CSV"), Some(BackendKind::S3));
        assert_eq!(table.route("b.jpg"), Some(BackendKind::Gcs));
        assert_eq!(table.route("photo.PNG"), Some(BackendKind::Gcs));
    }

    #[test]
    fn unmatched_and_extensionless_names_route_nowhere() {
        let table = table();
        assert_eq!(table.route("c.pdf"), None);
        assert_eq!(table.route("README"), None);
        assert_eq!(table.route("notes."), None);
        assert_eq!(table.route("a. txt"), None);
        assert_eq!(table.route("a.txt "), None);
    }

    #[test]
    fn overlapping_extension_goes_to_first_declared_backend() {
        let table = RoutingTable::new()
            .with_route(BackendKind::S3, ExtensionSet::parse_list("txt,jpg"))
            .with_route(BackendKind::Gcs, ExtensionSet::parse_list("jpg"));
        assert_eq!(table.route("shared.jpg"), Some(BackendKind::S3));

        let reversed = RoutingTable::new()
            .with_route(BackendKind::Gcs, ExtensionSet::parse_list("jpg"))
            .with_route(BackendKind::S3, ExtensionSet::parse_list("txt,jpg"));
        assert_eq!(reversed.route("shared.jpg"), Some(BackendKind::Gcs));
    }

    #[test]
    fn backends_are_listed_in_priority_order() {
        let order: Vec<BackendKind> = table().backends().collect();
        assert_eq!(order, vec![BackendKind::S3, BackendKind::Gcs]);
    }
}
