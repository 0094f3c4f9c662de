// src/backend/storage/memory.rs
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager, VirtualMemory};
use ic_stable_structures::DefaultMemoryImpl;
use std::cell::RefCell;

// Define Memory IDs for stable structures
// Choose non-overlapping IDs
const WILLS_MEM_ID: MemoryId = MemoryId::new(0);
const WILL_INDEX_MEM_ID: MemoryId = MemoryId::new(1);
const ASSETS_MEM_ID: MemoryId = MemoryId::new(2);
const RECIPIENTS_MEM_ID: MemoryId = MemoryId::new(3);
const ALLOCATIONS_MEM_ID: MemoryId = MemoryId::new(4);
const ALLOCATION_VERSIONS_MEM_ID: MemoryId = MemoryId::new(5);
const AUDIT_LOG_MEM_ID: MemoryId = MemoryId::new(6);
const METRICS_MEM_ID: MemoryId = MemoryId::new(7);
const ID_COUNTERS_MEM_ID: MemoryId = MemoryId::new(8);
// Reserve IDs 9-19 for future use
const ADMIN_PRINCIPAL_MEM_ID: MemoryId = MemoryId::new(20);
const EMAIL_CONFIG_MEM_ID: MemoryId = MemoryId::new(21);

// Define memory type alias
pub type Memory = VirtualMemory<DefaultMemoryImpl>;

thread_local! {
    // Memory manager
    static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> = RefCell::new(
        MemoryManager::init(DefaultMemoryImpl::default())
    );
}

/// Get memory instance for a specific MemoryId.
pub fn get_memory(id: MemoryId) -> Memory {
    MEMORY_MANAGER.with(|m| m.borrow().get(id))
}

pub fn get_wills_memory() -> Memory {
    get_memory(WILLS_MEM_ID)
}

pub fn get_will_index_memory() -> Memory {
    get_memory(WILL_INDEX_MEM_ID)
}

pub fn get_assets_memory() -> Memory {
    get_memory(ASSETS_MEM_ID)
}

pub fn get_recipients_memory() -> Memory {
    get_memory(RECIPIENTS_MEM_ID)
}

pub fn get_allocations_memory() -> Memory {
    get_memory(ALLOCATIONS_MEM_ID)
}

pub fn get_allocation_versions_memory() -> Memory {
    get_memory(ALLOCATION_VERSIONS_MEM_ID)
}

pub fn get_audit_log_memory() -> Memory {
    get_memory(AUDIT_LOG_MEM_ID)
}

pub fn get_metrics_memory() -> Memory {
    get_memory(METRICS_MEM_ID)
}

pub fn get_id_counters_memory() -> Memory {
    get_memory(ID_COUNTERS_MEM_ID)
}

pub fn get_admin_principal_memory() -> Memory {
    get_memory(ADMIN_PRINCIPAL_MEM_ID)
}

pub fn get_email_config_memory() -> Memory {
    get_memory(EMAIL_CONFIG_MEM_ID)
}
