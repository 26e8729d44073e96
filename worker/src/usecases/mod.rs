pub mod reconcile_pending_payments;
