mod test_broadcast_policy;
mod test_invalid_frames_are_dropped;
