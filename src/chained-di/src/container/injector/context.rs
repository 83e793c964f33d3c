use crate::key::ServiceKey;

#[derive(Clone)]
pub struct CallContext<'a> {
    trace: InjectionTrace<'a>,
}

impl<'a> CallContext<'a> {
    pub fn new(key: &'a ServiceKey) -> Self {
        Self {
            trace: InjectionTrace::new(key),
        }
    }

    pub fn append<'b>(&'b self, key: &'b ServiceKey) -> CallContext<'b> {
        CallContext {
            trace: self.trace.append(key),
        }
    }

    pub fn key(&self) -> &ServiceKey {
        self.trace.key()
    }

    pub fn trace(&self) -> &InjectionTrace<'_> {
        &self.trace
    }
}

#[derive(Clone)]
pub struct InjectionTrace<'a> {
    key: &'a ServiceKey,
    previous: Option<&'a InjectionTrace<'a>>,
}

impl<'a> InjectionTrace<'a> {
    pub fn new(key: &'a ServiceKey) -> Self {
        Self {
            key,
            previous: None,
        }
    }

    pub fn append<'b>(&'b self, key: &'b ServiceKey) -> InjectionTrace<'b> {
        InjectionTrace {
            key,
            previous: Some(self),
        }
    }

    pub fn key(&self) -> &ServiceKey {
        self.key
    }

    pub fn previous(&self) -> Option<&InjectionTrace<'a>> {
        self.previous
    }

    pub fn previous_exist_key(&self, key: &ServiceKey) -> bool {
        let mut this = self;
        while let Some(previous) = this.previous() {
            if previous.key() == key {
                return true;
            }
            this = previous;
        }
        false
    }

    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut this = self;
        while let Some(previous) = this.previous() {
            depth += 1;
            this = previous;
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use crate::key;

    use super::*;

    #[test]
    fn injection_trace_previous_exist_key_succeeds() {
        let first = key::of::<i32>();
        let second = key::of::<i64>();
        let third = key::all::<i32>();

        let context = CallContext::new(&first);
        let context = context.append(&second);
        let context = context.append(&third);

        assert_eq!(context.key(), &third);
        assert_eq!(context.trace().depth(), 3);
        assert!(context.trace().previous_exist_key(&first));
        assert!(context.trace().previous_exist_key(&second));
        assert!(!context.trace().previous_exist_key(&third));
    }
}
