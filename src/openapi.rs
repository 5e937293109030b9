use utoipa::OpenApi;

use crate::models::{
    BookingCreatedResponse, BookingDetails, BookingListResponse, BookingLookupResponse,
    BookingRequest, ClassListResponse, ClassType, FitnessClassView,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_classes,
        crate::handlers::create_booking,
        crate::handlers::list_bookings,
        crate::handlers::get_booking
    ),
    components(schemas(
        ClassType,
        FitnessClassView,
        ClassListResponse,
        BookingRequest,
        BookingDetails,
        BookingCreatedResponse,
        BookingListResponse,
        BookingLookupResponse
    )),
    tags(
        (name = "studio", description = "Service index and health"),
        (name = "classes", description = "Class schedule"),
        (name = "bookings", description = "Slot reservation and booking lookup")
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_booking_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/classes/"));
        assert!(doc.paths.paths.contains_key("/book/"));
        assert!(doc.paths.paths.contains_key("/bookings/"));
    }
}
