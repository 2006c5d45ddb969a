pub mod dynamic_form;
pub mod form_page;
pub mod pagination;
pub mod submissions_page;
