mod responder;

pub use responder::ResponderService;
