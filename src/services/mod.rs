pub mod course_roles;
