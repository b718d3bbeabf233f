use crate::{define_index_newtype, solver::solution::route::Route};

define_index_newtype!(RouteIdx, Route);
