mod async_engine;
mod construct;
mod filters;
mod joins;
mod modifiers;
