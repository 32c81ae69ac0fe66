mod guard;

pub(crate) use guard::TaskGuard;
