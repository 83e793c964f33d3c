use std::sync::Arc;

use chained_di::prelude::*;
use chained_di::strategy::component::Component;

pub trait Named: Send + Sync + 'static {
    fn name(&self) -> &str;
}

pub struct Plain;

#[component(dyn Named)]
impl Plain {
    #[inject]
    pub fn new() -> Self {
        Self
    }
}

impl Named for Plain {
    fn name(&self) -> &str {
        "plain"
    }
}

fn assert_service<C: Component<Service = dyn Named>>() {}

fn main() {
    assert_service::<Plain>();
    let named: Arc<dyn Named> = Plain::new().post_process();
    assert_eq!(named.name(), "plain");
}
