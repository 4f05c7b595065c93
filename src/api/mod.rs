pub mod attendance;
pub mod health;
pub mod live;
pub mod print;

#[cfg(test)]
pub(crate) mod test_support;
