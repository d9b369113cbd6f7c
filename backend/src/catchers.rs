use rocket::{Request, catch};

#[catch(400)]
pub fn bad_request(_req: &Request) -> &'static str {
    "Invalid request parameters."
}

#[catch(404)]
pub fn not_found(_req: &Request) -> &'static str {
    "The requested resource was not found."
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> &'static str {
    "Invalid request parameters."
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> &'static str {
    "An internal server error occurred."
}
