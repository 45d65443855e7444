pub mod abstract_page;
pub mod decision_box;
pub mod review_box;
pub mod reviews_list;
