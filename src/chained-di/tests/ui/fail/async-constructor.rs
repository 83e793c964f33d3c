use chained_di::prelude::*;

pub struct Thing;

#[component]
impl Thing {
    #[inject]
    async fn new() -> Self {
        Self
    }
}

fn main() {
    let _ = Thing;
}
