mod api;
mod poi;
