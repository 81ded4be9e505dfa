use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Participants and admins
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            nome TEXT NOT NULL,
            senha_hash TEXT NOT NULL,
            admin INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

        -- Bearer sessions (token stored SHA-256 hashed)
        CREATE TABLE IF NOT EXISTS sessoes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token_hash TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessoes_token ON sessoes(token_hash);

        -- Price tiers with their own sales windows
        CREATE TABLE IF NOT EXISTS lotes (
            id TEXT PRIMARY KEY,
            nome TEXT NOT NULL,
            valor_centavos INTEGER NOT NULL,
            data_inicio INTEGER NOT NULL,
            data_fim INTEGER NOT NULL,
            ativo INTEGER NOT NULL DEFAULT 1,
            ordem INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Promotional coupons. usos is the consumed-use counter,
        -- incremented with a conditional UPDATE inside the registration
        -- transaction so a capped coupon cannot be oversold.
        CREATE TABLE IF NOT EXISTS cupons (
            id TEXT PRIMARY KEY,
            codigo TEXT NOT NULL UNIQUE,
            tipo TEXT NOT NULL CHECK (tipo IN ('PERCENTUAL', 'FIXO')),
            desconto INTEGER NOT NULL,
            ativo INTEGER NOT NULL DEFAULT 1,
            data_inicio INTEGER NOT NULL,
            data_validade INTEGER NOT NULL,
            uso_maximo INTEGER,
            uso_por_usuario INTEGER,
            valor_minimo_centavos INTEGER,
            usos INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_cupons_codigo ON cupons(codigo);

        -- Registrations: one per user, one per CPF. Soft-cancel via status.
        CREATE TABLE IF NOT EXISTS inscricoes (
            id TEXT PRIMARY KEY,
            codigo TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL UNIQUE REFERENCES users(id),
            lote_id TEXT NOT NULL REFERENCES lotes(id),
            cupom_id TEXT REFERENCES cupons(id),
            nome TEXT NOT NULL,
            cpf TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL,
            telefone TEXT NOT NULL,
            data_nascimento TEXT NOT NULL,
            tamanho_camiseta TEXT NOT NULL,
            equipe TEXT,
            valor_centavos INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDENTE'
                CHECK (status IN ('PENDENTE', 'PAGO', 'CANCELADO')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_inscricoes_status ON inscricoes(status);
        CREATE INDEX IF NOT EXISTS idx_inscricoes_cupom ON inscricoes(cupom_id);

        -- 1:1 with inscricoes, created in the same transaction
        CREATE TABLE IF NOT EXISTS pagamentos (
            id TEXT PRIMARY KEY,
            inscricao_id TEXT NOT NULL UNIQUE REFERENCES inscricoes(id),
            transacao_id TEXT NOT NULL,
            valor_centavos INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDENTE'
                CHECK (status IN ('PENDENTE', 'APROVADO', 'RECUSADO', 'REEMBOLSADO')),
            metodo TEXT CHECK (metodo IS NULL OR metodo IN ('MERCADO_PAGO', 'PIX', 'CARTAO')),
            provedor TEXT CHECK (provedor IS NULL OR provedor IN ('mercadopago', 'pagbank')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_pagamentos_transacao ON pagamentos(transacao_id);
        "#,
    )
}
