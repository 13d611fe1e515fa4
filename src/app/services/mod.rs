pub mod ensure_dir;
pub mod stager;

#[cfg(test)]
pub(crate) mod test_support;
