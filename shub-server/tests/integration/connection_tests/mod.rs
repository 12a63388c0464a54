mod test_connect_joins_home_room;
mod test_rejected_origin_is_closed;
