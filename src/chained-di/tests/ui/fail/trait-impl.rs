use chained_di::prelude::*;

pub struct Thing;

#[component]
impl Default for Thing {
    #[inject]
    fn default() -> Self {
        Self
    }
}

fn main() {
    let _ = Thing;
}
