pub mod events;

pub use events::{
    create_event,
    delete_event,
    get_event,
    list_events,
    update_event,
    CreateEventRequest,
    EventResponse,
    ListEventsQuery,
    UpdateEventRequest,
};
