use std::path::PathBuf;

xflags::xflags! {
    /// SASL/GSSAPI client. Authenticates to a broker using a Kerberos keytab.
    cmd gssapi-sasl {
        /// Broker address in `host:port` form.
        /// The host part is used to build the service principal.
        required --broker broker: String

        /// Service name of the broker principal. For example, kafka.
        required --service service: String

        /// Keytab holding the client principal's key.
        required --keytab keytab: PathBuf

        /// Client principal. For example, client@EXAMPLE.COM.
        required --principal principal: String

        /// Path to the `kinit` program. Defaults to `kinit` from PATH.
        optional --kinit kinit: PathBuf

        /// Maximum number of CONTINUE rounds.
        optional --max-rounds max_rounds: u32
    }
}
