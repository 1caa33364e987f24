pub mod click;
pub mod password;
