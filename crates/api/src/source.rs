use crate::models::FileDescriptorRecord;

/// Lookup surface shared by the cache-backed proxy and a live reflection source.
///
/// Every lookup returns `None` when the requested descriptor is unknown;
/// implementations never fabricate results.
pub trait DescriptorSource {
    /// Find a file by its file name.
    fn find_file_by_name(&self, filename: &str) -> Option<FileDescriptorRecord>;

    /// Find the file declaring the given fully-qualified symbol.
    ///
    /// Members (methods, fields, nested types) resolve to the file of their
    /// enclosing declaration.
    fn find_file_containing_symbol(&self, symbol_name: &str) -> Option<FileDescriptorRecord>;

    /// Find the file defining an extension of `containing_type` with `field_number`.
    fn find_file_containing_extension(
        &self,
        containing_type: &str,
        field_number: i32,
    ) -> Option<FileDescriptorRecord>;

    /// Fully-qualified names of the services offered by the endpoint.
    fn services(&self) -> Vec<String>;
}
