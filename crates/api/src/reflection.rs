use crate::error::ApiResult;
use crate::models::FileDescriptorRecord;

/// Client side of a remote reflection endpoint.
///
/// Calls are blocking. "Not found" is reported as `Ok(None)`; `Err` is reserved
/// for transport or protocol failures.
pub trait ReflectionSource {
    /// Enumerate the fully-qualified names of all exposed services.
    fn list_services(&self) -> ApiResult<Vec<String>>;

    /// Resolve a file record by file name.
    fn file_by_filename(&self, filename: &str) -> ApiResult<Option<FileDescriptorRecord>>;

    /// Resolve the file declaring a fully-qualified symbol (e.g. a service name).
    fn file_containing_symbol(&self, symbol: &str) -> ApiResult<Option<FileDescriptorRecord>>;

    /// Resolve the file declaring an extension of `containing_type` with `field_number`.
    fn file_containing_extension(
        &self,
        containing_type: &str,
        field_number: i32,
    ) -> ApiResult<Option<FileDescriptorRecord>>;
}

impl<R: ReflectionSource + ?Sized> ReflectionSource for &R {
    fn list_services(&self) -> ApiResult<Vec<String>> {
        (**self).list_services()
    }

    fn file_by_filename(&self, filename: &str) -> ApiResult<Option<FileDescriptorRecord>> {
        (**self).file_by_filename(filename)
    }

    fn file_containing_symbol(&self, symbol: &str) -> ApiResult<Option<FileDescriptorRecord>> {
        (**self).file_containing_symbol(symbol)
    }

    fn file_containing_extension(
        &self,
        containing_type: &str,
        field_number: i32,
    ) -> ApiResult<Option<FileDescriptorRecord>> {
        (**self).file_containing_extension(containing_type, field_number)
    }
}

impl<R: ReflectionSource + ?Sized> ReflectionSource for Box<R> {
    fn list_services(&self) -> ApiResult<Vec<String>> {
        (**self).list_services()
    }

    fn file_by_filename(&self, filename: &str) -> ApiResult<Option<FileDescriptorRecord>> {
        (**self).file_by_filename(filename)
    }

    fn file_containing_symbol(&self, symbol: &str) -> ApiResult<Option<FileDescriptorRecord>> {
        (**self).file_containing_symbol(symbol)
    }

    fn file_containing_extension(
        &self,
        containing_type: &str,
        field_number: i32,
    ) -> ApiResult<Option<FileDescriptorRecord>> {
        (**self).file_containing_extension(containing_type, field_number)
    }
}

/// An established channel to an endpoint, able to open its reflection capability.
pub trait Connection {
    /// Open the reflection client. Failure here aborts proxy construction.
    fn open_reflection(&self) -> ApiResult<Box<dyn ReflectionSource>>;
}
