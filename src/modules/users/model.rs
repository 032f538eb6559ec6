pub use schoolhub_models::users::{
    ChangePasswordDto, CreateUserDto, PaginatedUsersResponse, USER_COLUMNS, UpdateProfileDto,
    UpdateUserDto, User, UserFilterParams, UserSummary,
};
