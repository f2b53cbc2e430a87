pub mod fs;
pub mod md_paths;
pub mod mdraid;
pub mod mdstat;

#[cfg(test)]
pub mod mock;
