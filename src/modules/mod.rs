pub mod principals;
pub mod session;
