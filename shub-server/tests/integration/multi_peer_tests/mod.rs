mod test_disconnect_notifies_rooms;
mod test_move_between_rooms;
