pub(crate) mod follower;
