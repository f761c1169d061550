mod federation;
mod mem_quad_store;
