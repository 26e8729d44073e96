use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::gateway::{
    InitiatePaymentRequest, InitiatedPayment, TransactionStatus, TransactionStatusQuery,
};

#[async_trait]
#[automock]
pub trait PaymentGateway {
    async fn initiate_payment(&self, request: InitiatePaymentRequest) -> Result<InitiatedPayment>;

    async fn check_transaction_status(
        &self,
        query: TransactionStatusQuery,
    ) -> Result<TransactionStatus>;
}
