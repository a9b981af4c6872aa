//! RPC client for one endpoint connection

use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{ReadHalf, WriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use crate::ipc::stream::{ClientStream, connect};
use crate::rpc::error::ClientError;
use crate::rpc::message::{EndpointInfo, Request, Response, VERSION_METHOD, line_codec};

pub struct RpcClient {
    address: String,
    reader: FramedRead<ReadHalf<ClientStream>, LinesCodec>,
    writer: FramedWrite<WriteHalf<ClientStream>, LinesCodec>,
    next_id: u64,
}

impl RpcClient {
    pub async fn connect(address: &str) -> Result<Self, ClientError> {
        let stream = connect(address).await?;
        let (reader, writer) = tokio::io::split(stream);
        Ok(Self {
            address: address.to_string(),
            reader: FramedRead::new(reader, line_codec()),
            writer: FramedWrite::new(writer, line_codec()),
            next_id: 1,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Send one request and wait for its response
    pub async fn call<P, R>(&mut self, method: &str, params: &P) -> Result<R, ClientError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let id = self.next_id;
        self.next_id += 1;

        let request = Request {
            id,
            method: method.to_string(),
            params: serde_json::to_value(params)?,
        };
        self.writer.send(serde_json::to_string(&request)?).await?;

        let line = self.reader.next().await.ok_or(ClientError::Closed)??;
        let response: Response = serde_json::from_str(&line)?;
        if response.id != id {
            return Err(ClientError::IdMismatch {
                expected: id,
                got: response.id,
            });
        }

        let value = response.into_result().map_err(|e| ClientError::Remote {
            method: method.to_string(),
            code: e.code,
            message: e.message,
        })?;
        Ok(serde_json::from_value(value)?)
    }

    /// Ask the endpoint which group and version it serves
    pub async fn endpoint_info(&mut self) -> Result<EndpointInfo, ClientError> {
        self.call(VERSION_METHOD, &()).await
    }
}
