/// The number of rows in the default block map grid.
pub const BLOCK_MAP_ROWS: usize = 8;
/// The number of cells in each row of the default block map grid.
pub const BLOCK_MAP_COLUMNS: usize = 8;

/// The name of the root directory of every `VirtualFileSystem`.
pub const ROOT_NAME: &str = "root";

/// The path which always resolves to the root directory.
pub(crate) const ROOT_PATH: &str = "/";
/// The path segment which refers to a directory's parent.
pub(crate) const PARENT_SEGMENT: &str = "..";
/// The separator between path segments.
pub(crate) const PATH_SEPARATOR: char = '/';
