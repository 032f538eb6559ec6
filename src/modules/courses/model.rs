pub use schoolhub_models::courses::{
    AdminEnrollDto, Course, CourseFilterParams, CourseStudent, CourseWithTeacher, CreateCourseDto,
    PaginatedCoursesResponse, SetGradeDto, UpdateCourseDto,
};
