pub use schoolhub_models::library::{
    Book, BookCategory, BookFilterParams, BookIssue, CardStatus, CheckoutDto, CreateBookDto,
    CreateCategoryDto, FinePayment, FineSummary, IssueCardParams, IssueStatus, IssueWithDetails,
    LibraryCard, PaginatedBooksResponse, PayFineDto, PaymentMode, UpdateBookDto,
    UpdateCardStatusDto,
};
