use std::sync::Arc;

use chained_di::prelude::*;

fn main() {
    // The host application owns the logger.
    let mut host = ServiceCollection::new();
    host.add_instance::<str>(Arc::from("greeter"))
        .add_singleton::<dyn Logger, ConsoleLogger>();
    let host = host.build_service_provider().unwrap();

    // The container knows nothing about logging and defers it to the host.
    let mut services = ServiceCollection::new();
    services
        .add_singleton::<dyn Greeter, EnglishGreeter>()
        .add_singleton::<dyn Greeter, ChineseGreeter>()
        .add_scoped::<App, App>();
    let provider = services
        .build_service_provider_with_fallback(Arc::new(host))
        .unwrap();

    let factory = provider
        .required_service::<dyn ServiceScopeFactory>()
        .unwrap();
    let scope = factory.create_scope().unwrap();
    let app = scope.service_provider().required_service::<App>().unwrap();
    app.run();
    scope.dispose().unwrap();
}

trait Logger: Send + Sync + 'static {
    fn log(&self, message: &str);
}

struct ConsoleLogger {
    app_name: Arc<str>,
}

#[component(dyn Logger)]
impl ConsoleLogger {
    #[inject]
    pub fn new(app_name: Arc<str>) -> Self {
        Self { app_name }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name, message);
    }
}

trait Greeter: Send + Sync + 'static {
    fn greet(&self);
}

struct EnglishGreeter {
    logger: Arc<dyn Logger>,
}

#[component(dyn Greeter)]
impl EnglishGreeter {
    #[inject]
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Greeter for EnglishGreeter {
    fn greet(&self) {
        self.logger.log("Hello World!");
    }
}

struct ChineseGreeter {
    logger: Arc<dyn Logger>,
}

#[component(dyn Greeter)]
impl ChineseGreeter {
    #[inject]
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Greeter for ChineseGreeter {
    fn greet(&self) {
        self.logger.log("你好世界!");
    }
}

struct App {
    logger: Arc<dyn Logger>,
    greeters: Vec<Arc<dyn Greeter>>,
}

#[component]
impl App {
    #[inject]
    fn new(logger: Arc<dyn Logger>, #[collect] greeters: Vec<Arc<dyn Greeter>>) -> Self {
        Self { logger, greeters }
    }

    fn run(&self) {
        self.logger.log("Greeting from managed objects:");
        for greeter in &self.greeters {
            greeter.greet();
        }
    }
}
