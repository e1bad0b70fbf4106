//! In-memory repository implementations for tests.
//!
//! Each mock keeps its rows in an `Arc<Mutex<Vec<_>>>` and applies the same
//! tenant-scope filtering as the SQLite implementations.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::{CrmError, TenantScope};

use super::*;

fn next(counter: &AtomicI64) -> i64 {
    counter.fetch_add(1, Ordering::SeqCst)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<User>>>,
    next_id: Arc<AtomicI64>,
    companies: Arc<Mutex<Vec<(i64, String)>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
            companies: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Registers a company name so created users can be joined against it.
    pub fn add_company(&self, id: i64, name: &str) {
        self.companies.lock().unwrap().push((id, name.to_owned()));
    }

    fn company_name(&self, company_id: Option<i64>) -> Option<String> {
        let id = company_id?;
        self.companies
            .lock()
            .unwrap()
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, name)| name.clone())
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, CrmError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CrmError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, CrmError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new.email) {
            return Err(CrmError::Validation("Email already in use".to_owned()));
        }
        let now = Utc::now();
        let user = User {
            id: next(&self.next_id),
            email: new.email,
            name: new.name,
            hashed_password: new.hashed_password,
            role: new.role,
            company_id: new.company_id,
            company_name: self.company_name(new.company_id),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockCustomerRepository {
    pub customers: Arc<Mutex<Vec<Customer>>>,
    next_id: Arc<AtomicI64>,
}

impl MockCustomerRepository {
    pub fn new() -> Self {
        Self {
            customers: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl CustomerRepository for MockCustomerRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Customer>, CrmError> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| scope.can_see(c.company_id))
            .cloned()
            .collect())
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Customer>, CrmError> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && scope.can_see(c.company_id))
            .cloned())
    }

    async fn create(&self, company_id: i64, new: NewCustomer) -> Result<Customer, CrmError> {
        let now = Utc::now();
        let customer = Customer {
            id: next(&self.next_id),
            company_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            status: new.status.unwrap_or(CustomerStatus::Lead),
            owner_id: new.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.customers.lock().unwrap().push(customer.clone());
        Ok(customer)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: CustomerUpdate,
    ) -> Result<Customer, CrmError> {
        let mut customers = self.customers.lock().unwrap();
        let customer = customers
            .iter_mut()
            .find(|c| c.id == id && scope.can_see(c.company_id))
            .ok_or(CrmError::NotFound)?;
        customer.name = update.name;
        customer.email = update.email;
        customer.phone = update.phone;
        customer.address = update.address;
        customer.status = update.status;
        customer.owner_id = update.owner_id;
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let mut customers = self.customers.lock().unwrap();
        let before = customers.len();
        customers.retain(|c| !(c.id == id && scope.can_see(c.company_id)));
        if customers.len() < before {
            Ok(())
        } else {
            Err(CrmError::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Deals
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockDealRepository {
    pub deals: Arc<Mutex<Vec<Deal>>>,
    next_id: Arc<AtomicI64>,
}

impl MockDealRepository {
    pub fn new() -> Self {
        Self {
            deals: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl DealRepository for MockDealRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Deal>, CrmError> {
        Ok(self
            .deals
            .lock()
            .unwrap()
            .iter()
            .filter(|d| scope.can_see(d.company_id))
            .cloned()
            .collect())
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Deal>, CrmError> {
        Ok(self
            .deals
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id && scope.can_see(d.company_id))
            .cloned())
    }

    async fn create(&self, company_id: i64, new: NewDeal) -> Result<Deal, CrmError> {
        let now = Utc::now();
        let deal = Deal {
            id: next(&self.next_id),
            company_id,
            customer_id: new.customer_id,
            title: new.title,
            product: new.product,
            value_cents: new.value_cents,
            currency: new.currency,
            stage: DealStage::Qualification,
            owner_id: new.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.deals.lock().unwrap().push(deal.clone());
        Ok(deal)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: DealUpdate,
    ) -> Result<Deal, CrmError> {
        let mut deals = self.deals.lock().unwrap();
        let deal = deals
            .iter_mut()
            .find(|d| d.id == id && scope.can_see(d.company_id))
            .ok_or(CrmError::NotFound)?;
        deal.title = update.title;
        deal.product = update.product;
        deal.value_cents = update.value_cents;
        deal.currency = update.currency;
        deal.owner_id = update.owner_id;
        deal.updated_at = Utc::now();
        Ok(deal.clone())
    }

    async fn set_stage(
        &self,
        scope: &TenantScope,
        id: i64,
        stage: DealStage,
    ) -> Result<Deal, CrmError> {
        let mut deals = self.deals.lock().unwrap();
        let deal = deals
            .iter_mut()
            .find(|d| d.id == id && scope.can_see(d.company_id))
            .ok_or(CrmError::NotFound)?;
        deal.stage = stage;
        deal.updated_at = Utc::now();
        Ok(deal.clone())
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let mut deals = self.deals.lock().unwrap();
        let before = deals.len();
        deals.retain(|d| !(d.id == id && scope.can_see(d.company_id)));
        if deals.len() < before {
            Ok(())
        } else {
            Err(CrmError::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockQuoteRepository {
    pub quotes: Arc<Mutex<Vec<Quote>>>,
    next_id: Arc<AtomicI64>,
}

impl MockQuoteRepository {
    pub fn new() -> Self {
        Self {
            quotes: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl QuoteRepository for MockQuoteRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Quote>, CrmError> {
        Ok(self
            .quotes
            .lock()
            .unwrap()
            .iter()
            .filter(|q| scope.can_see(q.company_id))
            .cloned()
            .collect())
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Quote>, CrmError> {
        Ok(self
            .quotes
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == id && scope.can_see(q.company_id))
            .cloned())
    }

    async fn create(&self, company_id: i64, new: NewQuote) -> Result<Quote, CrmError> {
        let now = Utc::now();
        let quote = Quote {
            id: next(&self.next_id),
            company_id,
            customer_id: new.customer_id,
            deal_id: new.deal_id,
            number: new.number,
            total_cents: new.total_cents,
            currency: new.currency,
            status: QuoteStatus::Draft,
            valid_until: new.valid_until,
            created_at: now,
            updated_at: now,
        };
        self.quotes.lock().unwrap().push(quote.clone());
        Ok(quote)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: QuoteUpdate,
    ) -> Result<Quote, CrmError> {
        let mut quotes = self.quotes.lock().unwrap();
        let quote = quotes
            .iter_mut()
            .find(|q| q.id == id && scope.can_see(q.company_id))
            .ok_or(CrmError::NotFound)?;
        if quote.status != QuoteStatus::Draft {
            return Err(CrmError::Validation(
                "Only draft quotes can be edited".to_owned(),
            ));
        }
        quote.total_cents = update.total_cents;
        quote.currency = update.currency;
        quote.valid_until = update.valid_until;
        quote.updated_at = Utc::now();
        Ok(quote.clone())
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: QuoteStatus,
    ) -> Result<Quote, CrmError> {
        let mut quotes = self.quotes.lock().unwrap();
        let quote = quotes
            .iter_mut()
            .find(|q| q.id == id && scope.can_see(q.company_id))
            .ok_or(CrmError::NotFound)?;
        quote.status = status;
        quote.updated_at = Utc::now();
        Ok(quote.clone())
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let mut quotes = self.quotes.lock().unwrap();
        let before = quotes.len();
        quotes.retain(|q| !(q.id == id && scope.can_see(q.company_id)));
        if quotes.len() < before {
            Ok(())
        } else {
            Err(CrmError::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockInvoiceRepository {
    pub invoices: Arc<Mutex<Vec<Invoice>>>,
    next_id: Arc<AtomicI64>,
}

impl MockInvoiceRepository {
    pub fn new() -> Self {
        Self {
            invoices: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl InvoiceRepository for MockInvoiceRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Invoice>, CrmError> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|i| scope.can_see(i.company_id))
            .cloned()
            .collect())
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Invoice>, CrmError> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id && scope.can_see(i.company_id))
            .cloned())
    }

    async fn create(&self, company_id: i64, new: NewInvoice) -> Result<Invoice, CrmError> {
        let now = Utc::now();
        let invoice = Invoice {
            id: next(&self.next_id),
            company_id,
            customer_id: new.customer_id,
            quote_id: new.quote_id,
            number: new.number,
            total_cents: new.total_cents,
            currency: new.currency,
            status: InvoiceStatus::Draft,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        };
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(invoice)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: InvoiceUpdate,
    ) -> Result<Invoice, CrmError> {
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .iter_mut()
            .find(|i| i.id == id && scope.can_see(i.company_id))
            .ok_or(CrmError::NotFound)?;
        if invoice.status != InvoiceStatus::Draft {
            return Err(CrmError::Validation(
                "Only draft invoices can be edited".to_owned(),
            ));
        }
        invoice.total_cents = update.total_cents;
        invoice.currency = update.currency;
        invoice.due_date = update.due_date;
        invoice.updated_at = Utc::now();
        Ok(invoice.clone())
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: InvoiceStatus,
    ) -> Result<Invoice, CrmError> {
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .iter_mut()
            .find(|i| i.id == id && scope.can_see(i.company_id))
            .ok_or(CrmError::NotFound)?;
        invoice.status = status;
        invoice.updated_at = Utc::now();
        Ok(invoice.clone())
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let mut invoices = self.invoices.lock().unwrap();
        let before = invoices.len();
        invoices.retain(|i| !(i.id == id && scope.can_see(i.company_id)));
        if invoices.len() < before {
            Ok(())
        } else {
            Err(CrmError::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Shipments
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockShipmentRepository {
    pub shipments: Arc<Mutex<Vec<Shipment>>>,
    next_id: Arc<AtomicI64>,
}

impl MockShipmentRepository {
    pub fn new() -> Self {
        Self {
            shipments: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl ShipmentRepository for MockShipmentRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Shipment>, CrmError> {
        Ok(self
            .shipments
            .lock()
            .unwrap()
            .iter()
            .filter(|s| scope.can_see(s.company_id))
            .cloned()
            .collect())
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Shipment>, CrmError> {
        Ok(self
            .shipments
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id && scope.can_see(s.company_id))
            .cloned())
    }

    async fn create(&self, company_id: i64, new: NewShipment) -> Result<Shipment, CrmError> {
        let now = Utc::now();
        let shipment = Shipment {
            id: next(&self.next_id),
            company_id,
            invoice_id: new.invoice_id,
            carrier: new.carrier,
            tracking_number: new.tracking_number,
            status: ShipmentStatus::Pending,
            shipped_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        };
        self.shipments.lock().unwrap().push(shipment.clone());
        Ok(shipment)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: ShipmentUpdate,
    ) -> Result<Shipment, CrmError> {
        let mut shipments = self.shipments.lock().unwrap();
        let shipment = shipments
            .iter_mut()
            .find(|s| s.id == id && scope.can_see(s.company_id))
            .ok_or(CrmError::NotFound)?;
        shipment.carrier = update.carrier;
        shipment.tracking_number = update.tracking_number;
        shipment.updated_at = Utc::now();
        Ok(shipment.clone())
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: ShipmentStatus,
    ) -> Result<Shipment, CrmError> {
        let mut shipments = self.shipments.lock().unwrap();
        let shipment = shipments
            .iter_mut()
            .find(|s| s.id == id && scope.can_see(s.company_id))
            .ok_or(CrmError::NotFound)?;
        let now = Utc::now();
        shipment.status = status;
        match status {
            ShipmentStatus::InTransit => shipment.shipped_at = Some(now),
            ShipmentStatus::Delivered => shipment.delivered_at = Some(now),
            _ => {}
        }
        shipment.updated_at = now;
        Ok(shipment.clone())
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let mut shipments = self.shipments.lock().unwrap();
        let before = shipments.len();
        shipments.retain(|s| !(s.id == id && scope.can_see(s.company_id)));
        if shipments.len() < before {
            Ok(())
        } else {
            Err(CrmError::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockTaskRepository {
    pub tasks: Arc<Mutex<Vec<TaskItem>>>,
    next_id: Arc<AtomicI64>,
}

impl MockTaskRepository {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<TaskItem>, CrmError> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| scope.can_see(t.company_id))
            .cloned()
            .collect())
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<TaskItem>, CrmError> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id && scope.can_see(t.company_id))
            .cloned())
    }

    async fn create(&self, company_id: i64, new: NewTask) -> Result<TaskItem, CrmError> {
        let now = Utc::now();
        let task = TaskItem {
            id: next(&self.next_id),
            company_id,
            title: new.title,
            description: new.description,
            status: TaskStatus::Open,
            priority: new.priority.unwrap_or(TaskPriority::Medium),
            assignee_id: new.assignee_id,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        };
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: TaskUpdate,
    ) -> Result<TaskItem, CrmError> {
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id && scope.can_see(t.company_id))
            .ok_or(CrmError::NotFound)?;
        task.title = update.title;
        task.description = update.description;
        task.priority = update.priority;
        task.assignee_id = update.assignee_id;
        task.due_date = update.due_date;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: TaskStatus,
    ) -> Result<TaskItem, CrmError> {
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id && scope.can_see(t.company_id))
            .ok_or(CrmError::NotFound)?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| !(t.id == id && scope.can_see(t.company_id)));
        if tasks.len() < before {
            Ok(())
        } else {
            Err(CrmError::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockTicketRepository {
    pub tickets: Arc<Mutex<Vec<Ticket>>>,
    next_id: Arc<AtomicI64>,
}

impl MockTicketRepository {
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl TicketRepository for MockTicketRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Ticket>, CrmError> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| scope.can_see(t.company_id))
            .cloned()
            .collect())
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Ticket>, CrmError> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id && scope.can_see(t.company_id))
            .cloned())
    }

    async fn create(&self, company_id: i64, new: NewTicket) -> Result<Ticket, CrmError> {
        let now = Utc::now();
        let ticket = Ticket {
            id: next(&self.next_id),
            company_id,
            customer_id: new.customer_id,
            subject: new.subject,
            body: new.body,
            status: TicketStatus::Open,
            priority: new.priority.unwrap_or(TaskPriority::Medium),
            assignee_id: new.assignee_id,
            created_at: now,
            updated_at: now,
        };
        self.tickets.lock().unwrap().push(ticket.clone());
        Ok(ticket)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: TicketUpdate,
    ) -> Result<Ticket, CrmError> {
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id && scope.can_see(t.company_id))
            .ok_or(CrmError::NotFound)?;
        ticket.subject = update.subject;
        ticket.body = update.body;
        ticket.priority = update.priority;
        ticket.assignee_id = update.assignee_id;
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    async fn set_status(
        &self,
        scope: &TenantScope,
        id: i64,
        status: TicketStatus,
    ) -> Result<Ticket, CrmError> {
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id && scope.can_see(t.company_id))
            .ok_or(CrmError::NotFound)?;
        ticket.status = status;
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let mut tickets = self.tickets.lock().unwrap();
        let before = tickets.len();
        tickets.retain(|t| !(t.id == id && scope.can_see(t.company_id)));
        if tickets.len() < before {
            Ok(())
        } else {
            Err(CrmError::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Vendors
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockVendorRepository {
    pub vendors: Arc<Mutex<Vec<Vendor>>>,
    next_id: Arc<AtomicI64>,
}

impl MockVendorRepository {
    pub fn new() -> Self {
        Self {
            vendors: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl VendorRepository for MockVendorRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<Vendor>, CrmError> {
        Ok(self
            .vendors
            .lock()
            .unwrap()
            .iter()
            .filter(|v| scope.can_see(v.company_id))
            .cloned()
            .collect())
    }

    async fn find(&self, scope: &TenantScope, id: i64) -> Result<Option<Vendor>, CrmError> {
        Ok(self
            .vendors
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id && scope.can_see(v.company_id))
            .cloned())
    }

    async fn create(&self, company_id: i64, new: NewVendor) -> Result<Vendor, CrmError> {
        let now = Utc::now();
        let vendor = Vendor {
            id: next(&self.next_id),
            company_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            category: new.category,
            created_at: now,
            updated_at: now,
        };
        self.vendors.lock().unwrap().push(vendor.clone());
        Ok(vendor)
    }

    async fn update(
        &self,
        scope: &TenantScope,
        id: i64,
        update: VendorUpdate,
    ) -> Result<Vendor, CrmError> {
        let mut vendors = self.vendors.lock().unwrap();
        let vendor = vendors
            .iter_mut()
            .find(|v| v.id == id && scope.can_see(v.company_id))
            .ok_or(CrmError::NotFound)?;
        vendor.name = update.name;
        vendor.email = update.email;
        vendor.phone = update.phone;
        vendor.category = update.category;
        vendor.updated_at = Utc::now();
        Ok(vendor.clone())
    }

    async fn delete(&self, scope: &TenantScope, id: i64) -> Result<(), CrmError> {
        let mut vendors = self.vendors.lock().unwrap();
        let before = vendors.len();
        vendors.retain(|v| !(v.id == id && scope.can_see(v.company_id)));
        if vendors.len() < before {
            Ok(())
        } else {
            Err(CrmError::NotFound)
        }
    }
}

// ---------------------------------------------------------------------------
// Approvals
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockApprovalRepository {
    pub approvals: Arc<Mutex<Vec<ApprovalRequest>>>,
    next_id: Arc<AtomicI64>,
}

impl MockApprovalRepository {
    pub fn new() -> Self {
        Self {
            approvals: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl ApprovalRepository for MockApprovalRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<ApprovalRequest>, CrmError> {
        Ok(self
            .approvals
            .lock()
            .unwrap()
            .iter()
            .filter(|a| scope.can_see(a.company_id))
            .cloned()
            .collect())
    }

    async fn find(
        &self,
        scope: &TenantScope,
        id: i64,
    ) -> Result<Option<ApprovalRequest>, CrmError> {
        Ok(self
            .approvals
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id && scope.can_see(a.company_id))
            .cloned())
    }

    async fn create(
        &self,
        company_id: i64,
        requested_by: i64,
        new: NewApproval,
    ) -> Result<ApprovalRequest, CrmError> {
        let now = Utc::now();
        let approval = ApprovalRequest {
            id: next(&self.next_id),
            company_id,
            kind: new.kind,
            subject_id: new.subject_id,
            requested_by,
            status: ApprovalStatus::Pending,
            decided_by: None,
            decided_at: None,
            note: new.note,
            created_at: now,
            updated_at: now,
        };
        self.approvals.lock().unwrap().push(approval.clone());
        Ok(approval)
    }

    async fn decide(
        &self,
        scope: &TenantScope,
        id: i64,
        status: ApprovalStatus,
        decided_by: i64,
        note: Option<String>,
    ) -> Result<ApprovalRequest, CrmError> {
        let mut approvals = self.approvals.lock().unwrap();
        let approval = approvals
            .iter_mut()
            .find(|a| a.id == id && scope.can_see(a.company_id))
            .ok_or(CrmError::NotFound)?;
        if approval.status != ApprovalStatus::Pending {
            return Err(CrmError::Validation(
                "Approval request already decided".to_owned(),
            ));
        }
        let now = Utc::now();
        approval.status = status;
        approval.decided_by = Some(decided_by);
        approval.decided_at = Some(now);
        if note.is_some() {
            approval.note = note;
        }
        approval.updated_at = now;
        Ok(approval.clone())
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockNotificationRepository {
    pub notifications: Arc<Mutex<Vec<Notification>>>,
    next_id: Arc<AtomicI64>,
}

impl MockNotificationRepository {
    pub fn new() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl NotificationRepository for MockNotificationRepository {
    async fn list_for_user(
        &self,
        scope: &TenantScope,
        user_id: i64,
    ) -> Result<Vec<Notification>, CrmError> {
        let mut rows: Vec<Notification> = self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id && scope.can_see(n.company_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create(&self, new: NewNotification) -> Result<Notification, CrmError> {
        let notification = Notification {
            id: next(&self.next_id),
            company_id: new.company_id,
            user_id: new.user_id,
            title: new.title,
            body: new.body,
            read_at: None,
            created_at: Utc::now(),
        };
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn mark_read(
        &self,
        scope: &TenantScope,
        id: i64,
        user_id: i64,
    ) -> Result<Notification, CrmError> {
        let mut notifications = self.notifications.lock().unwrap();
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id && scope.can_see(n.company_id))
            .ok_or(CrmError::NotFound)?;
        if notification.read_at.is_none() {
            notification.read_at = Some(Utc::now());
        }
        Ok(notification.clone())
    }
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockActivityLogRepository {
    pub entries: Arc<Mutex<Vec<ActivityLog>>>,
    next_id: Arc<AtomicI64>,
}

impl MockActivityLogRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl ActivityLogRepository for MockActivityLogRepository {
    async fn list(&self, scope: &TenantScope) -> Result<Vec<ActivityLog>, CrmError> {
        let mut rows: Vec<ActivityLog> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| scope.can_see(e.company_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn record(&self, new: NewActivity) -> Result<ActivityLog, CrmError> {
        let entry = ActivityLog {
            id: next(&self.next_id),
            company_id: new.company_id,
            user_id: new.user_id,
            action: new.action,
            entity: new.entity,
            entity_id: new.entity_id,
            detail: new.detail,
            created_at: Utc::now(),
        };
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }
}

// ---------------------------------------------------------------------------
// Report cache
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockReportCacheRepository {
    pub entries: Arc<Mutex<Vec<ReportCacheEntry>>>,
}

impl MockReportCacheRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(vec![])),
        }
    }
}

#[async_trait]
impl ReportCacheRepository for MockReportCacheRepository {
    async fn get(
        &self,
        report_type: &str,
        scope: &str,
    ) -> Result<Option<ReportCacheEntry>, CrmError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.report_type == report_type && e.scope == scope)
            .cloned())
    }

    async fn put(&self, entry: ReportCacheEntry) -> Result<(), CrmError> {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|e| !(e.report_type == entry.report_type && e.scope == entry.scope));
        entries.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_customer_tenant_isolation() {
        let repo = MockCustomerRepository::new();
        let new = |name: &str| NewCustomer {
            name: name.to_owned(),
            email: None,
            phone: None,
            address: None,
            status: None,
            owner_id: None,
        };

        repo.create(1, new("Tenant One Customer")).await.unwrap();
        repo.create(2, new("Tenant Two Customer")).await.unwrap();

        let scoped = repo.list(&TenantScope::Company(1)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert!(scoped.iter().all(|c| c.company_id == 1));

        let global = repo.list(&TenantScope::Global).await.unwrap();
        assert_eq!(global.len(), 2);
    }

    #[tokio::test]
    async fn test_cross_tenant_find_invisible() {
        let repo = MockCustomerRepository::new();
        let created = repo
            .create(
                1,
                NewCustomer {
                    name: "Acme".to_owned(),
                    email: None,
                    phone: None,
                    address: None,
                    status: None,
                    owner_id: None,
                },
            )
            .await
            .unwrap();

        let other = repo.find(&TenantScope::Company(2), created.id).await.unwrap();
        assert!(other.is_none());

        let own = repo.find(&TenantScope::Company(1), created.id).await.unwrap();
        assert!(own.is_some());
    }

    #[tokio::test]
    async fn test_report_cache_put_overwrites() {
        let repo = MockReportCacheRepository::new();

        repo.put(ReportCacheEntry {
            report_type: "sales".to_owned(),
            scope: "1".to_owned(),
            payload: serde_json::json!({"v": 1}),
            computed_at: Utc::now(),
        })
        .await
        .unwrap();

        repo.put(ReportCacheEntry {
            report_type: "sales".to_owned(),
            scope: "1".to_owned(),
            payload: serde_json::json!({"v": 2}),
            computed_at: Utc::now(),
        })
        .await
        .unwrap();

        let entry = repo.get("sales", "1").await.unwrap().unwrap();
        assert_eq!(entry.payload["v"], 2);
        assert_eq!(repo.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approval_double_decide_rejected() {
        let repo = MockApprovalRepository::new();
        let approval = repo
            .create(
                1,
                10,
                NewApproval {
                    kind: ApprovalKind::QuoteDiscount,
                    subject_id: 5,
                    note: None,
                },
            )
            .await
            .unwrap();

        let scope = TenantScope::Company(1);
        repo.decide(&scope, approval.id, ApprovalStatus::Approved, 11, None)
            .await
            .unwrap();

        let err = repo
            .decide(&scope, approval.id, ApprovalStatus::Rejected, 11, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CrmError::Validation(_)));
    }
}
