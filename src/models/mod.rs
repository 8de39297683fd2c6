pub mod course_team;
pub mod table_filter;
