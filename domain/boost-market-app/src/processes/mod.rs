pub mod click_counter;
pub mod late_orders;
