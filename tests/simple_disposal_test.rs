/// Simple test to understand keelwork-di disposal patterns

use keelwork_di::{ServiceCollection, Resolver, Dispose};
use std::sync::atomic::{AtomicU32, Ordering};

static DISPOSAL_COUNT: AtomicU32 = AtomicU32::new(0);

#[derive(Debug)]
struct TestService {
    id: u32,
}

impl TestService {
    fn new(id: u32) -> Self {
        Self { id }
    }
}

impl Dispose for TestService {
    fn dispose(&self) {
        DISPOSAL_COUNT.fetch_add(1, Ordering::SeqCst);
        println!("TestService {} disposed!", self.id);
    }
}

#[tokio::test]
async fn test_explicit_disposal_registration() {
    DISPOSAL_COUNT.store(0, Ordering::SeqCst);
    
    let mut services = ServiceCollection::new();
    services.add_scoped_factory::<TestService, _>(|_| TestService::new(1));
    
    let provider = services.build().unwrap();
    let scope = provider.create_scope();

    // Resolve service normally - should NOT auto-register for disposal
    let service = scope.get_required::<TestService>();
    assert_eq!(service.id, 1);

    // Explicitly register for disposal
    scope.register_disposer(service);

    // Must explicitly dispose before dropping
    scope.close_async().await.unwrap();

    assert_eq!(DISPOSAL_COUNT.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scope_drop_without_registration() {
    DISPOSAL_COUNT.store(0, Ordering::SeqCst);

    let mut services = ServiceCollection::new();
    services.add_scoped_factory::<TestService, _>(|_| TestService::new(3));

    let provider = services.build().unwrap();
    let scope = provider.create_scope();
    
    // Resolve service without registering for disposal
    let _service = scope.get_required::<TestService>();
    
    // Drop scope - service should NOT be disposed
    drop(scope);
    
    assert_eq!(DISPOSAL_COUNT.load(Ordering::SeqCst), 0);
}